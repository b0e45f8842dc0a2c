use std::sync::{Mutex, MutexGuard};

static PENDING: Mutex<Option<Vec<String>>> = Mutex::new(None);

fn pending() -> MutexGuard<'static, Option<Vec<String>>> {
    PENDING.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Start holding notices back, e.g. while a report is being printed.
pub fn hold() {
    *pending() = Some(Vec::new());
}

/// Stop holding notices and return the ones collected so far.
pub fn release() -> Vec<String> {
    pending().take().unwrap_or_default()
}

/// Emit a notice. Held notices are queued; otherwise they go straight to stderr.
pub fn emit(msg: String) {
    let mut guard = pending();
    if let Some(queue) = guard.as_mut() {
        queue.push(msg);
    } else {
        drop(guard);
        eprintln!("{}", msg);
    }
}

/// Like `eprintln!`, but queued while notices are held.
#[macro_export]
macro_rules! notice {
    ($($arg:tt)*) => {
        $crate::notice::emit(format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_held_notices_are_released_in_order() {
        hold();
        crate::notice!("Could not save simulation: {}", "offline");
        crate::notice!("second");
        let released = release();
        assert_eq!(
            released,
            vec![
                "Could not save simulation: offline".to_string(),
                "second".to_string()
            ]
        );
        assert!(release().is_empty());
    }
}
