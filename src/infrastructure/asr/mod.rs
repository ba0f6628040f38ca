mod daglo_client;

pub use daglo_client::DagloClient;
