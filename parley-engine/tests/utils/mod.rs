pub mod mock_ui;
pub mod raw_peer;

pub use mock_devices::*;
pub use mock_transport::*;
pub use mock_ui::*;
pub use raw_peer::*;
pub use test_client::*;
