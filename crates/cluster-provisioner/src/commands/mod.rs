pub mod bx;
