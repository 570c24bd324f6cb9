use std::fmt;
use std::fs;
use std::path::Path;

use rand::seq::IndexedRandom;

use crate::error::ScrapeError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyEndpoint {
    pub host: String,
    pub port: u16,
}

impl fmt::Display for ProxyEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Fixed set of `host:port` endpoints, populated once at startup.
#[derive(Debug, Default)]
pub struct ProxyPool {
    endpoints: Vec<ProxyEndpoint>,
}

impl ProxyPool {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScrapeError> {
        let text = fs::read_to_string(path.as_ref()).map_err(|e| {
            ScrapeError::Config(format!(
                "cannot read proxy list {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::parse(&text)
    }

    pub fn parse(input: &str) -> Result<Self, ScrapeError> {
        let mut endpoints = Vec::new();

        for line in input.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let (host, port) = line.split_once(':').ok_or_else(|| invalid_line(line))?;
            if host.is_empty() || port.contains(':') {
                return Err(invalid_line(line));
            }
            let port: u16 = port.parse().map_err(|_| invalid_line(line))?;

            endpoints.push(ProxyEndpoint {
                host: host.to_string(),
                port,
            });
        }

        Ok(Self { endpoints })
    }

    /// One endpoint chosen uniformly at random.
    pub fn pick(&self) -> Result<&ProxyEndpoint, ScrapeError> {
        self.endpoints
            .choose(&mut rand::rng())
            .ok_or(ScrapeError::EmptyPool)
    }

    pub fn endpoints(&self) -> &[ProxyEndpoint] {
        &self.endpoints
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

fn invalid_line(line: &str) -> ScrapeError {
    ScrapeError::Config(format!("invalid proxy line '{}', expected host:port", line))
}
