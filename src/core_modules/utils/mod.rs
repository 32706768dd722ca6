pub mod mask_io;
