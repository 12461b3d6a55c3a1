//! Errors from agent containers and agent sets.

use herd_core::{AgentId, BreedId};
use herd_dataset::DataSetError;
use std::error::Error;
use std::fmt;

/// Errors from [`AgentArray`](crate::AgentArray) and agent set operations.
#[derive(Clone, Debug, PartialEq)]
pub enum AgentError {
    /// A sorted insert found an element with an equal key at its slot.
    DuplicateKey {
        /// Slot the element would have occupied.
        index: usize,
    },
    /// A sample asked for more elements than are available.
    NotEnoughItems {
        /// Number requested.
        requested: usize,
        /// Number available.
        available: usize,
    },
    /// An extreme was requested from an empty array.
    EmptyArray,
    /// No live agent has this id.
    UnknownAgent {
        /// Name of the set searched.
        set: String,
        /// The missing id.
        id: AgentId,
    },
    /// The breed id is not registered with this set.
    UnknownBreed {
        /// Name of the set searched.
        set: String,
        /// The unregistered breed.
        breed: BreedId,
    },
    /// The turtle is not an end of the link.
    NotALinkEnd {
        /// The link.
        link: AgentId,
        /// The turtle that is not one of its ends.
        turtle: AgentId,
    },
    /// Diffusion only supports 4- and 8-neighbourhoods.
    UnsupportedNeighborhood {
        /// The neighbourhood size requested.
        n: usize,
    },
    /// Every `u32` id has been handed out by this set.
    IdsExhausted {
        /// Name of the set.
        set: String,
    },
    /// A raster operation failed.
    DataSet(DataSetError),
}

impl fmt::Display for AgentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateKey { index } => {
                write!(f, "insert: an element with an equal key exists at {index}")
            }
            Self::NotEnoughItems {
                requested,
                available,
            } => {
                write!(f, "requested {requested} items but only {available} available")
            }
            Self::EmptyArray => write!(f, "operation requires a non-empty array"),
            Self::UnknownAgent { set, id } => write!(f, "{set}: no live agent with id {id}"),
            Self::UnknownBreed { set, breed } => write!(f, "{set}: no breed {breed}"),
            Self::NotALinkEnd { link, turtle } => {
                write!(f, "turtle {turtle} is not an end of link {link}")
            }
            Self::UnsupportedNeighborhood { n } => {
                write!(f, "diffusion needs 4 or 8 neighbours, got {n}")
            }
            Self::IdsExhausted { set } => write!(f, "{set}: agent ids exhausted"),
            Self::DataSet(e) => write!(f, "data set: {e}"),
        }
    }
}

impl Error for AgentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::DataSet(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DataSetError> for AgentError {
    fn from(e: DataSetError) -> Self {
        Self::DataSet(e)
    }
}
