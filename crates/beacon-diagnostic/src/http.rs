//! Diagnostics for the HTTP server

use crate::{message, DynError};
use beacon_core::{Field, Logger};
use chrono::{DateTime, Utc};
use std::io;
use std::time::Duration;

/// Everything logged about one served request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLog {
    pub host: String,
    pub username: String,
    pub start: DateTime<Utc>,
    pub method: String,
    pub uri: String,
    pub protocol: String,
    pub status: u16,
    pub referer: String,
    pub user_agent: String,
    pub request_id: String,
    pub duration: Duration,
}

impl RequestLog {
    /// The request rendered as fields, in declaration order
    pub fn fields(&self) -> [Field; 11] {
        [
            Field::new("host", self.host.as_str()),
            Field::new("username", self.username.as_str()),
            Field::time("start", self.start),
            Field::new("method", self.method.as_str()),
            Field::new("uri", self.uri.as_str()),
            Field::new("protocol", self.protocol.as_str()),
            Field::display("status", self.status),
            Field::new("referer", self.referer.as_str()),
            Field::new("user_agent", self.user_agent.as_str()),
            Field::new("request_id", self.request_id.as_str()),
            Field::duration("duration", self.duration),
        ]
    }
}

/// Events the HTTP server reports
pub trait HttpDiagnostic: Send + Sync {
    fn starting_service(&self);

    fn stopped_service(&self);

    fn shutdown_timeout(&self);

    fn authentication_enabled(&self, enabled: bool);

    fn listening_on(&self, addr: &str, protocol: &str);

    fn write_body_received(&self, body: &str);

    fn http_request_completed(&self, request: &RequestLog);

    /// A handler panicked while serving `request` and the server recovered
    fn recovery_error(&self, message: &str, err: &DynError, request: &RequestLog);

    fn error(&self, message: &str, err: &DynError);

    /// Writer for the server's own error output. Each line becomes one
    /// error entry; a partial last line is written on flush or drop.
    fn server_error_log(&self) -> Box<dyn io::Write + Send>;
}

pub(crate) struct HttpHandler<L> {
    logger: L,
}

impl<L: Logger> HttpHandler<L> {
    pub(crate) fn new(logger: L) -> Self {
        Self { logger }
    }
}

impl<L: Logger> HttpDiagnostic for HttpHandler<L> {
    fn starting_service(&self) {
        self.logger.info("starting HTTP service", &[]);
    }

    fn stopped_service(&self) {
        self.logger.info("closed HTTP service", &[]);
    }

    fn shutdown_timeout(&self) {
        self.logger.error(
            "shutdown timed out, forcefully closing all remaining connections",
            &[],
        );
    }

    fn authentication_enabled(&self, enabled: bool) {
        self.logger
            .info("authentication", &[Field::bool("enabled", enabled)]);
    }

    fn listening_on(&self, addr: &str, protocol: &str) {
        self.logger.info(
            "listening on",
            &[Field::new("addr", addr), Field::new("protocol", protocol)],
        );
    }

    fn write_body_received(&self, body: &str) {
        self.logger
            .debug("write body received by handler", &[Field::new("body", body)]);
    }

    fn http_request_completed(&self, request: &RequestLog) {
        self.logger.info("http request completed", &request.fields());
    }

    fn recovery_error(&self, msg: &str, err: &DynError, request: &RequestLog) {
        let mut fields = Vec::with_capacity(12);
        fields.push(Field::error(err));
        fields.extend(request.fields());
        self.logger
            .error(message(msg, "recovered from http handler panic"), &fields);
    }

    fn error(&self, msg: &str, err: &DynError) {
        self.logger
            .error(message(msg, "http error"), &[Field::error(err)]);
    }

    fn server_error_log(&self) -> Box<dyn io::Write + Send> {
        Box::new(ServerErrorLog::new(self.logger.with_fields(&[])))
    }
}

/// Longest line held back waiting for a newline. Anything longer is emitted
/// in pieces of this size.
const MAX_PENDING: usize = 64 * 1024;

/// Line-buffered adapter from the server's error writer to the logger
struct ServerErrorLog<L: Logger> {
    logger: L,
    pending: Vec<u8>,
}

impl<L: Logger> ServerErrorLog<L> {
    fn new(logger: L) -> Self {
        Self {
            logger,
            pending: Vec::new(),
        }
    }

    fn emit(&self, line: &[u8]) {
        let text = String::from_utf8_lossy(line);
        let text = text.trim_end_matches('\r');
        if text.is_empty() {
            return;
        }
        self.logger
            .error("http server error", &[Field::new("detail", text)]);
    }
}

impl<L: Logger> io::Write for ServerErrorLog<L> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            self.emit(&line[..pos]);
        }
        while self.pending.len() >= MAX_PENDING {
            let chunk: Vec<u8> = self.pending.drain(..MAX_PENDING).collect();
            self.emit(&chunk);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.pending.is_empty() {
            let line = std::mem::take(&mut self.pending);
            self.emit(&line);
        }
        Ok(())
    }
}

impl<L: Logger> Drop for ServerErrorLog<L> {
    fn drop(&mut self) {
        let _ = io::Write::flush(self);
    }
}
