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

use std::{error::Error, iter::successors};

/// Error which panics when created.
///
/// Lets tests use `?` on anything that is a [`std::error::Error`], the panic message contains the
/// whole chain of causes.
#[derive(Debug)]
pub enum Panic {}

impl<E> From<E> for Panic
where
    E: Error,
{
    fn from(error: E) -> Self {
        let message = successors(Some(&error as &dyn Error), |&error| error.source())
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\nCaused By: ");
        panic!("{message}");
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Error as IoError, ErrorKind};

    use super::*;

    #[test]
    #[should_panic(expected = "missing vocab")]
    fn test_panic_on_error() {
        fn fails() -> Result<(), Panic> {
            Err(IoError::new(ErrorKind::NotFound, "missing vocab"))?;
            Ok(())
        }
        fails().ok();
    }
}
