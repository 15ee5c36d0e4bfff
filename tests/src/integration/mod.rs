//! Cross-subsystem integration tests.

#[cfg(test)]
mod concurrency;
#[cfg(test)]
mod fixtures;
#[cfg(test)]
mod flows;
