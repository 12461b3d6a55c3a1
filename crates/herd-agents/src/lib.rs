//! Agent collections for the herd simulation kernel.
//!
//! Three kinds of agent live in a model: fixed grid cells ([`Patches`]),
//! mobile [`Turtles`], and [`Links`] joining pairs of turtles. Each kind
//! is stored in an [`AgentSet`], which owns id assignment, breed
//! sub-typing, shared default field values, and the ask protocols that
//! keep iteration correct while callbacks add, remove or re-breed agents.
//!
//! | Module | Role |
//! |---|---|
//! | [`agent_array`] | ordered container with aggregate, sampling and sorted-insert operations |
//! | [`agent_set`] | arena storage, breeds, default tables |
//! | [`ask`] | mutation-safe iteration protocols |
//! | [`agent_list`] | rectangle, radius and cone filters over positioned agents |
//! | [`patches`] | the patch grid, neighbourhoods, diffusion, raster import/export |
//! | [`turtles`] | mobile agents, movement and edge policies |
//! | [`links`] | edges between turtles |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod agent_array;
pub mod agent_list;
pub mod agent_set;
pub mod ask;
pub mod error;
pub mod links;
pub mod patches;
pub mod turtles;
pub mod value;

pub use agent_array::{AgentArray, Histogram};
pub use agent_list::{Locate, Origin};
pub use agent_set::{AgentRecord, AgentSet, Breed, Scope};
pub use error::AgentError;
pub use links::{LinkState, Links};
pub use patches::{PatchState, Patches, RectKey};
pub use turtles::{EdgeHandler, EdgeOutcome, EdgePolicy, TurtleState, Turtles};
pub use value::{Value, Vars};
