mod explore;
mod train;

pub use explore::ExploreCommand;
pub use train::TrainCommand;
