// Copyright 2021 Xayn AG
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, version 3.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Setup tracing for the binaries.

use std::{fs::OpenOptions, path::Path, sync::Mutex};

use tracing::{error, Dispatch};
use tracing_subscriber::{
    filter::LevelFilter,
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
};

/// Initializes the logging.
///
/// Events are written to stderr and, if a file is given, as json to the file. Panics are logged
/// as errors.
///
/// Even though this returns an error if logging was already initialized you
/// should only call this function when you expect it to succeed.
pub fn initialize_global(level: LevelFilter, file: Option<&Path>) -> Result<(), TryInitError> {
    create_trace_dispatch(level, file).try_init()?;
    init_panic_logging();
    Ok(())
}

fn create_trace_dispatch(level: LevelFilter, file: Option<&Path>) -> Dispatch {
    let stderr_log = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let file_log = file
        .map(|file| {
            OpenOptions::new()
                .write(true)
                .truncate(true)
                .create(true)
                .open(file)
                .map(|writer| {
                    tracing_subscriber::fmt::layer()
                        .with_writer(Mutex::new(writer))
                        .with_ansi(false)
                        .json()
                })
        })
        .transpose()
        .map_err(|error| {
            eprintln!("Setup file logging failed: {error}");
        })
        .ok()
        .flatten();

    tracing_subscriber::registry()
        .with(stderr_log)
        .with(file_log)
        .with(level)
        .into()
}

fn init_panic_logging() {
    std::panic::set_hook(Box::new(|panic| {
        if let Some(location) = panic.location() {
            error!(
                message = %panic,
                panic.file = location.file(),
                panic.line = location.line(),
                panic.column = location.column(),
            );
        } else {
            error!(message = %panic);
        }
    }));
}

#[cfg(test)]
mod tests {
    use std::fs::read_to_string;

    use tracing::{debug, dispatcher::with_default, info};

    use super::*;

    #[test]
    fn test_file_log() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("squad.log");
        let dispatch = create_trace_dispatch(LevelFilter::INFO, Some(&file));
        with_default(&dispatch, || {
            info!(aligned = 3, "aligned examples");
            debug!("filtered by level");
        });

        let log = read_to_string(file).unwrap();
        assert!(log.contains("aligned examples"));
        assert!(log.contains("\"aligned\":3"));
        assert!(!log.contains("filtered by level"));
    }

    #[test]
    fn test_invalid_file_log() {
        let dir = tempfile::tempdir().unwrap();
        let dispatch = create_trace_dispatch(LevelFilter::INFO, Some(dir.path()));
        with_default(&dispatch, || info!("still logs to stderr"));
    }
}
