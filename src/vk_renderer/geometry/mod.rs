pub mod fundamental;
