// SPDX-License-Identifier: MIT

//! Lightweight newtype identifiers.
//!
//! Job and worker names are deterministic strings (`"worker1"`,
//! `"worker1.job3"`), not random IDs, so unlike a UUID-backed ID type these
//! carry no generator — just the display/equality/serde boilerplate.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_name {
    ($(#[$meta:meta])* pub struct $name:ident;) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }
    };
}

define_name! {
    /// Unique name of a worker, e.g. `"worker1"`.
    pub struct WorkerName;
}

define_name! {
    /// Unique name of a job within its worker's lifetime, e.g. `"worker1.job3"`.
    pub struct JobName;
}

impl JobName {
    /// Build a job name from a worker name and a 1-based job index.
    pub fn for_worker(worker: &WorkerName, job_index: u64) -> Self {
        Self(format!("{worker}.job{job_index}"))
    }
}

#[cfg(test)]
#[path = "name_tests.rs"]
mod tests;
