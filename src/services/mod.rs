pub mod file_loader;
pub mod pci;
