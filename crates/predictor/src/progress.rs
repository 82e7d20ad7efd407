use {base::log, std::time::Instant};

/// Logs how far a loop over a known number of steps has got. Purely
/// informational; at most one line per tenth of the work plus the last
/// step.
pub struct Progress {
    label: String,
    total: usize,
    done: usize,
    next_report: usize,
    started: Instant,
}

impl Progress {
    pub fn new(label: &str, total: usize) -> Self {
        Self {
            label: format!("{label:12}"),
            total,
            done: 0,
            next_report: 0,
            started: Instant::now(),
        }
    }

    pub fn done(&self) -> usize {
        self.done
    }

    pub fn advance(&mut self) {
        self.done += 1;
        if self.done >= self.next_report || self.done == self.total {
            let percent = if self.total == 0 {
                100
            } else {
                self.done * 100 / self.total
            };
            log::info!(
                "{}: {:3}% {}/{} [{:.1?}]",
                self.label,
                percent,
                self.done,
                self.total,
                self.started.elapsed()
            );
            self.next_report = self.done + (self.total / 10).max(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_counts_steps() {
        let mut progress = Progress::new("Prediction", 3);
        for _ in 0..3 {
            progress.advance();
        }
        assert_eq!(progress.done(), 3);
        assert_eq!(progress.label, "Prediction  ");
    }
}
