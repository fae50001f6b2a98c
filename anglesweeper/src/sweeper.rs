/*!
The sweep loop.

This module provides the core streaming functionality: for every sweep it
writes the 360 sample lines to the channel, in order, and then starts again
from zero degrees until stopped.
*/

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use chrono::Local;
use shared::protocol::BITS_PER_BYTE;
use shared::{Result, SampleFormat, Sweep};
use tracing::{debug, info};

/// Why the sweep loop returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The configured number of sweeps has been emitted
    LimitReached,
    /// The running flag was cleared (Ctrl+C)
    Interrupted,
    /// The reader of the channel went away
    ChannelClosed,
}

/// Counters kept while sweeping
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub sweeps_completed: u64,
    pub lines_emitted: u64,
    pub bytes_written: u64,
}

/// Throttles writes to the byte rate of a serial line
#[derive(Debug)]
pub struct LinePacer {
    baud_rate: u32,
    started: Instant,
    bytes_sent: u64,
}

impl LinePacer {
    pub fn new(baud_rate: u32) -> Self {
        Self {
            baud_rate,
            started: Instant::now(),
            bytes_sent: 0,
        }
    }

    /// Time a serial line at `baud_rate` needs to transmit `bytes`
    pub fn transmit_duration(baud_rate: u32, bytes: u64) -> Duration {
        let bits = bytes * u64::from(BITS_PER_BYTE);
        Duration::from_secs_f64(bits as f64 / f64::from(baud_rate.max(1)))
    }

    /// Record `bytes` as sent and sleep until the line would have caught up
    pub fn pace(&mut self, bytes: usize) {
        self.bytes_sent += bytes as u64;
        let due = Self::transmit_duration(self.baud_rate, self.bytes_sent);
        let elapsed = self.started.elapsed();
        if due > elapsed {
            thread::sleep(due - elapsed);
        }
    }
}

/// Streams sweeps of angle samples to a channel
pub struct AngleSweeper<W: Write> {
    channel: W,
    format: SampleFormat,
    sweep_limit: Option<u64>,
    stats_interval_sweeps: u64,
    pace_baud_rate: Option<u32>,
    pacer: Option<LinePacer>,
    running: Arc<AtomicBool>,
    stats: SweepStats,
}

impl<W: Write> AngleSweeper<W> {
    /// Create a sweeper that owns `channel`
    pub fn new(channel: W, format: SampleFormat) -> Self {
        Self {
            channel,
            format,
            sweep_limit: None,
            stats_interval_sweeps: 0,
            pace_baud_rate: None,
            pacer: None,
            running: Arc::new(AtomicBool::new(true)),
            stats: SweepStats::default(),
        }
    }

    /// Stop after `limit` complete sweeps
    pub fn with_sweep_limit(mut self, limit: Option<u64>) -> Self {
        self.sweep_limit = limit;
        self
    }

    /// Log statistics every `interval` sweeps; zero disables
    pub fn with_stats_interval(mut self, interval: u64) -> Self {
        self.stats_interval_sweeps = interval;
        self
    }

    /// Throttle output to `baud_rate`; the clock starts when `run` does
    pub fn with_pacing(mut self, baud_rate: u32) -> Self {
        self.pace_baud_rate = Some(baud_rate);
        self
    }

    /// Get a reference to the running flag for external control
    pub fn get_running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    pub fn stats(&self) -> SweepStats {
        self.stats
    }

    /// Give the channel back, e.g. to inspect what was written
    pub fn into_channel(self) -> W {
        self.channel
    }

    /// Sweep until the limit is reached, the flag is cleared or the reader
    /// goes away. Any other write failure is returned as an I/O error.
    pub fn run(&mut self) -> Result<StopReason> {
        let session_start = Local::now();
        let start_time = Instant::now();
        self.pacer = self.pace_baud_rate.map(LinePacer::new);
        info!(
            "🚀 Sweep session started at {} (precision: {}, limit: {:?})",
            session_start.format("%Y-%m-%d %H:%M:%S"),
            self.format.precision(),
            self.sweep_limit
        );

        let reason = loop {
            if let Some(limit) = self.sweep_limit {
                if self.stats.sweeps_completed >= limit {
                    break StopReason::LimitReached;
                }
            }

            match self.emit_sweep() {
                Ok(true) => {}
                Ok(false) => break StopReason::Interrupted,
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                    info!("Channel reader closed the stream");
                    break StopReason::ChannelClosed;
                }
                Err(e) => return Err(e.into()),
            }

            if self.stats_interval_sweeps > 0
                && self.stats.sweeps_completed % self.stats_interval_sweeps == 0
            {
                let elapsed = start_time.elapsed().as_secs_f64();
                info!(
                    "📊 {} sweeps, {} lines, {:.1} KB, {:.1} lines/s",
                    self.stats.sweeps_completed,
                    self.stats.lines_emitted,
                    self.stats.bytes_written as f64 / 1024.0,
                    self.stats.lines_emitted as f64 / elapsed.max(f64::EPSILON)
                );
            }
        };

        let elapsed = start_time.elapsed();
        info!("📈 Sweeper final stats ({:?}):", reason);
        info!("   Sweeps: {}", self.stats.sweeps_completed);
        info!("   Lines: {}", self.stats.lines_emitted);
        info!("   Bytes: {}", self.stats.bytes_written);
        info!("   Duration: {:.1}s", elapsed.as_secs_f64());

        Ok(reason)
    }

    /// Emit one sweep. Returns `false` if the running flag was cleared before
    /// the sweep finished; a partial sweep is not counted.
    pub fn emit_sweep(&mut self) -> io::Result<bool> {
        for sample in Sweep::new() {
            if !self.running.load(Ordering::SeqCst) {
                self.channel.flush()?;
                debug!("Sweep interrupted at {}°", sample.degree);
                return Ok(false);
            }

            let written = self.format.write_line(&mut self.channel, &sample)?;
            self.stats.lines_emitted += 1;
            self.stats.bytes_written += written as u64;

            if let Some(pacer) = self.pacer.as_mut() {
                self.channel.flush()?;
                pacer.pace(written);
            }
        }

        self.channel.flush()?;
        self.stats.sweeps_completed += 1;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::SharedError;

    /// Writer whose reader has gone away
    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Writer that fails with something other than a closed pipe
    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "device unplugged"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Clears the running flag once `stop_after` lines have been written
    struct StoppingWriter {
        lines: Vec<u8>,
        stop_after: usize,
        running: Arc<AtomicBool>,
    }

    impl Write for StoppingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.lines.extend_from_slice(buf);
            let written = self.lines.iter().filter(|&&b| b == b'\n').count();
            if written >= self.stop_after {
                self.running.store(false, Ordering::SeqCst);
            }
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn run_sweeps(count: u64) -> (String, SweepStats) {
        let mut sweeper = AngleSweeper::new(Vec::new(), SampleFormat::default())
            .with_sweep_limit(Some(count));
        assert_eq!(sweeper.run().unwrap(), StopReason::LimitReached);
        let stats = sweeper.stats();
        (String::from_utf8(sweeper.into_channel()).unwrap(), stats)
    }

    #[test]
    fn test_single_sweep_lines() {
        let (output, stats) = run_sweeps(1);
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 360);
        assert_eq!(lines[0], "1.000000\t0.000000\t1");
        assert!(lines[180].starts_with("-1.000000\t"));
        for line in &lines {
            let fields: Vec<&str> = line.split('\t').collect();
            assert_eq!(fields.len(), 3);
            assert_eq!(fields[2], "1");
        }

        assert_eq!(stats.sweeps_completed, 1);
        assert_eq!(stats.lines_emitted, 360);
        assert_eq!(stats.bytes_written, output.len() as u64);
    }

    #[test]
    fn test_values_follow_degree_order() {
        let (output, _) = run_sweeps(1);
        let format = SampleFormat::default();
        for (degree, line) in output.lines().enumerate() {
            let radians = degree as f64 * (std::f64::consts::PI / 180.0);
            let expected = format!("{:.6}\t{:.6}\t1", radians.cos(), radians.sin());
            assert_eq!(line, expected, "degree {}", degree);
        }
        assert_eq!(format.precision(), 6);
    }

    #[test]
    fn test_sweeps_repeat_byte_identical() {
        let (output, stats) = run_sweeps(3);
        assert_eq!(stats.lines_emitted, 3 * 360);
        assert_eq!(output.len() % 3, 0);

        let third = output.len() / 3;
        assert_eq!(&output[..third], &output[third..2 * third]);
        assert_eq!(&output[third..2 * third], &output[2 * third..]);
        assert!(output[third..].starts_with("1.000000\t0.000000\t1\n"));
    }

    #[test]
    fn test_zero_limit_emits_nothing() {
        let (output, stats) = run_sweeps(0);
        assert!(output.is_empty());
        assert_eq!(stats, SweepStats::default());
    }

    #[test]
    fn test_cleared_flag_interrupts() {
        let mut sweeper = AngleSweeper::new(Vec::new(), SampleFormat::default());
        sweeper.get_running_flag().store(false, Ordering::SeqCst);

        assert_eq!(sweeper.run().unwrap(), StopReason::Interrupted);
        assert_eq!(sweeper.stats().sweeps_completed, 0);
        assert!(sweeper.into_channel().is_empty());
    }

    #[test]
    fn test_interrupt_mid_sweep_is_not_counted() {
        let running = Arc::new(AtomicBool::new(true));
        let writer = StoppingWriter {
            lines: Vec::new(),
            stop_after: 100,
            running: Arc::clone(&running),
        };
        let mut sweeper = AngleSweeper::new(writer, SampleFormat::default());
        sweeper.running = running;

        assert_eq!(sweeper.run().unwrap(), StopReason::Interrupted);
        let stats = sweeper.stats();
        assert_eq!(stats.sweeps_completed, 0);
        assert_eq!(stats.lines_emitted, 100);

        let output = String::from_utf8(sweeper.into_channel().lines).unwrap();
        assert_eq!(output.lines().count(), 100);
        assert_eq!(output.len() as u64, stats.bytes_written);
        assert!(output.ends_with('\n'));
    }

    #[test]
    fn test_paced_run_takes_line_time() {
        let mut sweeper = AngleSweeper::new(Vec::new(), SampleFormat::new(0).unwrap())
            .with_sweep_limit(Some(1))
            .with_pacing(115_200);

        // Time spent before run() must not count toward the line budget
        thread::sleep(Duration::from_millis(50));
        let start = Instant::now();
        assert_eq!(sweeper.run().unwrap(), StopReason::LimitReached);
        let elapsed = start.elapsed();

        let stats = sweeper.stats();
        assert_eq!(stats.lines_emitted, 360);
        let due = LinePacer::transmit_duration(115_200, stats.bytes_written);
        assert!(elapsed >= due, "{:?} < {:?}", elapsed, due);
        assert_eq!(sweeper.into_channel().len() as u64, stats.bytes_written);
    }

    #[test]
    fn test_broken_pipe_stops_cleanly() {
        let mut sweeper = AngleSweeper::new(ClosedPipe, SampleFormat::default());
        assert_eq!(sweeper.run().unwrap(), StopReason::ChannelClosed);
        assert_eq!(sweeper.stats().lines_emitted, 0);
    }

    #[test]
    fn test_write_failure_is_returned() {
        let mut sweeper = AngleSweeper::new(FailingWriter, SampleFormat::default());
        match sweeper.run() {
            Err(SharedError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::Other),
            other => panic!("expected an I/O error, got {:?}", other),
        }
    }

    #[test]
    fn test_transmit_duration() {
        assert_eq!(LinePacer::transmit_duration(9600, 960), Duration::from_secs(1));
        assert_eq!(LinePacer::transmit_duration(9600, 0), Duration::ZERO);
        assert_eq!(
            LinePacer::transmit_duration(115_200, 11_520),
            Duration::from_secs(1)
        );
    }

    #[test]
    fn test_pacing_slows_output() {
        // Two lines of 20 bytes at 4000 baud take at least 100ms on the wire
        let start = Instant::now();
        let mut pacer = LinePacer::new(4000);
        pacer.pace(20);
        pacer.pace(20);
        assert!(start.elapsed() >= Duration::from_millis(100));
    }
}
