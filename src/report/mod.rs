mod printer;

pub use printer::ReportPrinter;
