mod common;
mod schedule;
mod shell;
