//! Operator console abstraction

use async_trait::async_trait;
use crate::error::ClientResult;

/// Line-oriented operator I/O. Prompts block the calling workflow until a
/// line arrives; printing never blocks.
#[async_trait]
pub trait Console: Send + Sync {
    /// Show `prompt` and read one line. `None` signals end of input.
    async fn read_line(&self, prompt: &str) -> ClientResult<Option<String>>;

    /// Print one line of output
    fn print_line(&self, line: &str);
}

/// EIP-55 checksummed rendering used for every address shown to the operator
pub fn address_label(address: &ethers::types::Address) -> String {
    ethers::utils::to_checksum(address, None)
}
