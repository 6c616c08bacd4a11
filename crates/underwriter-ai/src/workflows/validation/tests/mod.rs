mod common;

mod evaluation;
