pub mod chopping;
pub mod color_picker;
pub mod laptop_terminal;
pub mod lockpick;
pub mod pincracker;
pub mod roof_running;
pub mod thermite;
pub mod word_memory;
