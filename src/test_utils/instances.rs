use crate::CimInstance;
use crate::CimValue;

pub const ACCOUNT_CLASS: &str = "LMI_Account";
pub const ACCOUNT_FILTER: &str =
    "SELECT * FROM LMI_AccountInstanceCreationIndication WHERE SourceInstance ISA LMI_Account";

/// A minimal account-like instance: one key (`UserID`), one ordinary
/// property (`Name`).
pub fn account(
    uid: u32,
    name: &str,
) -> CimInstance {
    CimInstance::new(ACCOUNT_CLASS)
        .with_key("UserID", CimValue::Uint32(uid))
        .with_property("Name", CimValue::Str(name.to_string()))
}

/// An account with one extra ordinary property, for count-mismatch cases.
pub fn account_with_shell(
    uid: u32,
    name: &str,
    shell: &str,
) -> CimInstance {
    account(uid, name).with_property("LoginShell", CimValue::Str(shell.to_string()))
}
