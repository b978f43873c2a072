pub mod clash;
pub mod common;
pub mod hysteria2;
pub mod mieru;
pub mod ss;
pub(crate) mod transport;
pub mod trojan;
pub mod vless;
pub mod vmess;

pub use clash::{explode_clash, is_clash_config};
pub use common::{
    explode, explode_records, records, split_scheme, ExplodeTable, SchemeParser,
    BUILTIN_PARSERS,
};
pub use hysteria2::{explode_hysteria2, Hysteria2Parser};
pub use mieru::{explode_mieru, MieruParser};
pub use ss::{explode_ss, ShadowsocksParser};
pub use trojan::{explode_trojan, TrojanParser};
pub use vless::{explode_vless, VlessParser};
pub use vmess::{explode_vmess, VmessParser};
