pub mod globals;
pub mod io;
pub mod math;
pub mod special_forms;
