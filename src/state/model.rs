/// Camera permission as tracked by the launcher.
///
/// `Granted` and `Denied` are where a request settles; `Denied` can be left
/// again by issuing a new request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PermissionState {
    #[default]
    Unknown,
    Requesting,
    Granted,
    Denied,
}

impl PermissionState {
    pub const fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }

    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Requesting)
    }
}
