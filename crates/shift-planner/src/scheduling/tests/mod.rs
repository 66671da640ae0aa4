mod common;

mod assignment;
