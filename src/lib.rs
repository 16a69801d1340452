pub mod betting;
pub mod cards;
pub mod cli;
pub mod counting;
pub mod display;
pub mod error;
pub mod hand;
pub mod job;
pub mod report;
pub mod resolution;
pub mod risk;
pub mod rules;
pub mod simulation;
pub mod stats;
pub mod strategy;
pub mod sweep;
