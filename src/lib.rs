pub mod ast;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod magnitude;
pub mod parser;
pub mod scalar;
pub mod tower;
pub mod ultra;

pub use error::{MagnitudeError, Result};
pub use eval::{evaluate, evaluate_source};
pub use magnitude::Magnitude;
pub use scalar::ScalarMagnitude;
pub use tower::TowerMagnitude;
pub use ultra::UltraTowerMagnitude;
