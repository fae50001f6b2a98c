/*!
Angle samples and their text rendering.

A sample is computed fresh for one integer degree and rendered as

```text
<cos>\t<sin>\t1\n
```

with a fixed number of fractional digits for both trig values.
*/

use std::fmt::Write as _;
use std::io;

use crate::error::{Result, SharedError};
use crate::protocol::{
    DEFAULT_PRECISION, FIELD_SEPARATOR, LINE_TERMINATOR, MAX_PRECISION, SAMPLE_MARKER,
};

/// Cosine and sine of one integer degree
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleSample {
    pub degree: u16,
    pub cos: f64,
    pub sin: f64,
}

impl AngleSample {
    /// Compute the sample for `degree`
    pub fn at(degree: u16) -> Self {
        let radians = f64::from(degree).to_radians();
        Self {
            degree,
            cos: radians.cos(),
            sin: radians.sin(),
        }
    }

    /// The constant third field
    pub fn marker(&self) -> u8 {
        SAMPLE_MARKER
    }
}

/// Fixed-point rendering of samples.
///
/// Rendering is locale independent. Negative values that round to zero keep
/// their sign, e.g. `-0.000000`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleFormat {
    precision: usize,
}

impl SampleFormat {
    /// Create a format with `precision` fractional digits
    pub fn new(precision: usize) -> Result<Self> {
        if precision > MAX_PRECISION {
            return Err(SharedError::config(format!(
                "precision {} exceeds maximum of {}",
                precision, MAX_PRECISION
            )));
        }
        Ok(Self { precision })
    }

    pub fn precision(&self) -> usize {
        self.precision
    }

    /// Append the rendered line (terminator included) to `out`
    pub fn render_into(&self, sample: &AngleSample, out: &mut String) {
        // Writing into a String cannot fail
        let _ = write!(
            out,
            "{:.*}{}{:.*}{}{}{}",
            self.precision,
            sample.cos,
            FIELD_SEPARATOR,
            self.precision,
            sample.sin,
            FIELD_SEPARATOR,
            sample.marker(),
            LINE_TERMINATOR,
        );
    }

    /// Render one line, terminator included
    pub fn render(&self, sample: &AngleSample) -> String {
        let mut line = String::with_capacity(2 * (self.precision + 4) + 4);
        self.render_into(sample, &mut line);
        line
    }

    /// Write one line to `writer`, returning the number of bytes written
    pub fn write_line<W: io::Write>(&self, writer: &mut W, sample: &AngleSample) -> io::Result<usize> {
        let line = self.render(sample);
        writer.write_all(line.as_bytes())?;
        Ok(line.len())
    }
}

impl Default for SampleFormat {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
        }
    }
}
