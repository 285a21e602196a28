use panel_core::notification::{Notice, Notifier};

/// Prints notices to stderr so they stay apart from command output.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, notice: Notice) {
        if notice.is_failure() {
            eprintln!("! {notice}");
        } else {
            eprintln!("{notice}");
        }
    }
}
