mod approval;
mod common;
mod routing;
mod schedule;
