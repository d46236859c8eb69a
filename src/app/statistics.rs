//! Batch statistics logging.

use log::info;
use strum::IntoEnumIterator;

use crate::error_handling::{ErrorType, InfoType, ProcessingStats, WarningType};

/// Logs the one-line outcome of a batch.
pub fn print_batch_summary(total: usize, successes: usize, failures: usize, elapsed_seconds: f64) {
    info!(
        "✅ Dispatched {} request{} ({} succeeded, {} failed) in {:.1}s",
        total,
        if total == 1 { "" } else { "s" },
        successes,
        failures,
        elapsed_seconds
    );
}

/// Logs non-zero error, warning, and retry counts by type.
pub fn print_error_statistics(stats: &ProcessingStats) {
    let total_errors = stats.total_errors();
    let total_warnings = stats.total_warnings();
    let total_info = stats.total_info();

    if total_errors > 0 {
        info!("Error Counts ({} total):", total_errors);
        for error_type in ErrorType::iter() {
            let count = stats.get_error_count(error_type);
            if count > 0 {
                info!("   {}: {}", error_type.as_str(), count);
            }
        }
    }

    if total_warnings > 0 {
        info!("Warning Counts ({} total):", total_warnings);
        for warning_type in WarningType::iter() {
            let count = stats.get_warning_count(warning_type);
            if count > 0 {
                info!("   {}: {}", warning_type.as_str(), count);
            }
        }
    }

    if total_info > 0 {
        info!("Retry Counts ({} total):", total_info);
        for info_type in InfoType::iter() {
            let count = stats.get_info_count(info_type);
            if count > 0 {
                info!("   {}: {}", info_type.as_str(), count);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_error_statistics_empty() {
        let stats = ProcessingStats::new();
        print_error_statistics(&stats);
    }

    #[test]
    fn test_print_error_statistics_all_kinds() {
        let stats = ProcessingStats::new();
        stats.increment_error(ErrorType::RateLimited);
        stats.increment_error(ErrorType::TransportConnect);
        stats.increment_warning(WarningType::NonSuccessStatusAccepted);
        stats.increment_info(InfoType::ServerRejected);
        stats.increment_info(InfoType::LocalBudgetWait);
        print_error_statistics(&stats);
        assert_eq!(stats.total_errors(), 2);
        assert_eq!(stats.total_info(), 2);
    }

    #[test]
    fn test_print_batch_summary_singular_and_plural() {
        print_batch_summary(1, 1, 0, 0.2);
        print_batch_summary(15, 10, 5, 31.4);
    }
}
