//! `aim-block` — the canonical block family (spec §4.3) and the `Block`/
//! `Engine` trait contracts (spec §4.2).
//!
//! # Crate layout
//!
//! | Module         | Contents                                             |
//! |----------------|---------------------------------------------------------|
//! | [`engine`]     | `Engine` trait — the block-facing slice of `Simulator`'s API |
//! | [`block`]      | `Block` trait, `eject_fifo_while` shared ejection helper |
//! | [`source`]     | `SourceBlock`                                        |
//! | [`queue`]      | `QueueBlock`                                         |
//! | [`delay`]      | `DelayBlock`                                         |
//! | [`gate`]       | `GateBlock`, `GateState`, `ReleaseMode`              |
//! | [`if_block`]   | `IfBlock`                                            |
//! | [`switch`]     | `SwitchBlock`                                        |
//! | [`restricted`] | `RestrictedAreaStart`, `RestrictedAreaEnd`           |
//! | [`combine`]    | `CombineContainerPort`, `CombinePickupPort`          |
//! | [`split`]      | `SplitBlock`                                         |
//! | [`sink`]       | `SinkBlock`                                          |
//! | [`conveyor`]   | `ConveyorBlock`, `ConveyorExit`                      |
//!
//! `aim-sim::Simulator` owns `Vec<Option<Box<dyn Block>>>` and implements
//! `Engine`; this crate has no dependency on `aim-sim` (see [`engine`]'s
//! module doc for why that split exists).

pub mod block;
pub mod combine;
pub mod conveyor;
pub mod delay;
pub mod engine;
pub mod gate;
pub mod if_block;
pub mod queue;
pub mod restricted;
pub mod sink;
pub mod source;
pub mod split;
pub mod switch;


pub use block::{deliver_in_held, eject_fifo_while, Block, BlockHooks};
pub use combine::{CombineContainerPort, CombinePickupPort, PickupBundle};
pub use conveyor::{ConveyorBlock, ConveyorExit};
pub use delay::DelayBlock;
pub use engine::{Engine, Rejected};
pub use gate::{GateBlock, GateState, ReleaseMode};
pub use if_block::IfBlock;
pub use queue::QueueBlock;
pub use restricted::{RestrictedAreaEnd, RestrictedAreaStart};
pub use sink::SinkBlock;
pub use source::SourceBlock;
pub use split::SplitBlock;
pub use switch::SwitchBlock;
