pub mod classify;
pub mod dice;
pub mod dictionary;
pub mod pathfinder;
pub mod round;
pub mod scoring;
pub mod session;

// Re-export main components
pub use classify::*;
pub use dice::*;
pub use dictionary::*;
pub use pathfinder::*;
pub use round::*;
pub use scoring::*;
pub use session::*;
