mod entry_model;
mod shelveset_model;

pub use entry_model::EntryRowModel;
pub use shelveset_model::ShelvesetModel;
