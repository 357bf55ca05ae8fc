pub mod abacus;
pub mod hamnet;
pub mod serialization;
pub mod wfsx;

mod dispatch;
mod traits;

pub use abacus::AbacusStore;
pub use dispatch::open_source;
pub use hamnet::HamnetStore;
pub use traits::WavefunctionSource;
pub use wfsx::WfsxStore;
