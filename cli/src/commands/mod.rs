//! CLI commands for the akshar tokenizer.

pub mod decode;
pub mod encode;
pub mod evaluate;
pub mod train;

pub use decode::DecodeCommand;
pub use encode::EncodeCommand;
pub use evaluate::EvaluateCommand;
pub use train::TrainCommand;
