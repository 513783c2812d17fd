mod common;

mod routing;
mod strategy;
