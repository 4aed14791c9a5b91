pub mod virtualcluster;
