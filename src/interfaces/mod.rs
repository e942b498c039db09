// Text rendering used by the command-line front end
pub mod report;
