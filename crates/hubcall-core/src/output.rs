//! Output streams for command results.
//!
//! Commands write through [`Output`] rather than `println!()` so tests can
//! capture what a command printed.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use serde_json::Value;

/// Writer that shares a buffer with test code via `Arc<Mutex<Vec<u8>>>`.
struct SharedWriter(Arc<Mutex<Vec<u8>>>);

impl Write for SharedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut inner = self
            .0
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Captured output that can be inspected after a command ran.
#[derive(Debug, Clone)]
pub struct TestOutput {
    out_buf: Arc<Mutex<Vec<u8>>>,
    err_buf: Arc<Mutex<Vec<u8>>>,
}

impl TestOutput {
    /// Captured stdout.
    pub fn stdout(&self) -> String {
        read_buffer(&self.out_buf)
    }

    /// Captured stderr.
    pub fn stderr(&self) -> String {
        read_buffer(&self.err_buf)
    }
}

fn read_buffer(buf: &Arc<Mutex<Vec<u8>>>) -> String {
    let buf = buf.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    String::from_utf8_lossy(&buf).to_string()
}

/// Stdout/stderr pair used by commands.
pub struct Output {
    out: Mutex<Box<dyn Write + Send>>,
    err: Mutex<Box<dyn Write + Send>>,
}

impl std::fmt::Debug for Output {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Output")
    }
}

impl Output {
    /// Output bound to the process stdout and stderr.
    pub fn system() -> Self {
        Self {
            out: Mutex::new(Box::new(io::stdout())),
            err: Mutex::new(Box::new(io::stderr())),
        }
    }

    /// Output captured into memory.
    pub fn test() -> (Self, TestOutput) {
        let out_buf = Arc::new(Mutex::new(Vec::new()));
        let err_buf = Arc::new(Mutex::new(Vec::new()));
        let output = Self {
            out: Mutex::new(Box::new(SharedWriter(out_buf.clone()))),
            err: Mutex::new(Box::new(SharedWriter(err_buf.clone()))),
        };
        (output, TestOutput { out_buf, err_buf })
    }

    /// Write a line to stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn println(&self, line: &str) -> io::Result<()> {
        let mut out = self
            .out
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        writeln!(out, "{line}")
    }

    /// Write a line to stderr.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn eprintln(&self, line: &str) -> io::Result<()> {
        let mut err = self
            .err
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        writeln!(err, "{line}")
    }

    /// Pretty-print a JSON value to stdout. `null` prints nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn print_json(&self, value: &Value) -> anyhow::Result<()> {
        if value.is_null() {
            return Ok(());
        }
        let text = serde_json::to_string_pretty(value)?;
        self.println(&text)?;
        Ok(())
    }
}
