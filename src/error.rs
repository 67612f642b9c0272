use std::error;
use std::fmt;

/// Errors reported when setting up or routing a network.  Internal invariant violations inside
/// the router are bugs, not errors, and cause a panic instead.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Error {
    /// The requested network size is zero or not a power of two.
    NotPowerOfTwo(usize),
    /// The requested network has more wires than fit in a `u32` wire label.
    TooLarge(usize),
    /// The permutation to route is not a bijection on the network's wires.
    InvalidPermutation(InvalidPermutation),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InvalidPermutation {
    /// The permutation has the wrong number of entries.
    Length { expected: usize, actual: usize },
    /// Input `input` is sent to an output that doesn't exist.
    OutOfRange { input: usize, output: u32 },
    /// Inputs `first` and `second` are both sent to `output`.
    Duplicate { output: u32, first: usize, second: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::NotPowerOfTwo(n) => {
                write!(fmt, "network size {} is not a power of two", n)
            },
            Error::TooLarge(n) => {
                write!(fmt, "network size {} is too large (at most 2^31 wires)", n)
            },
            Error::InvalidPermutation(ref e) => write!(fmt, "invalid permutation: {}", e),
        }
    }
}

impl fmt::Display for InvalidPermutation {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            InvalidPermutation::Length { expected, actual } => write!(
                fmt, "expected {} entries, but got {}", expected, actual,
            ),
            InvalidPermutation::OutOfRange { input, output } => write!(
                fmt, "input {} is sent to output {}, which is out of range", input, output,
            ),
            InvalidPermutation::Duplicate { output, first, second } => write!(
                fmt, "inputs {} and {} are both sent to output {}", first, second, output,
            ),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::InvalidPermutation(ref e) => Some(e),
            _ => None,
        }
    }
}

impl error::Error for InvalidPermutation {}

impl From<InvalidPermutation> for Error {
    fn from(x: InvalidPermutation) -> Error {
        Error::InvalidPermutation(x)
    }
}
