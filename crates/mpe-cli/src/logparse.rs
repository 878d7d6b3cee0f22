//! Training log parser.
//!
//! Training logs report progress in blocks:
//!
//! ```text
//! ... updates 5/100 episodes, total num timesteps 1200/24000 ...
//! <any line>
//! average episode rewards is -41.2
//! policy entropy is 1.58
//! eval average episode rewards of agent: -38.9      (optional)
//! ```
//!
//! A block is five lines when the eval line is present, four otherwise.

use anyhow::Result;
use regex::Regex;

/// Metric series extracted from one log
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrainingSeries {
    pub episodes: Vec<u64>,
    pub timesteps: Vec<u64>,
    pub avg_rewards: Vec<f64>,
    pub entropies: Vec<f64>,
    /// Episodes that carried an eval line
    pub eval_episodes: Vec<u64>,
    pub eval_rewards: Vec<f64>,
}

impl TrainingSeries {
    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.episodes.len()
    }
}

pub struct LogParser {
    episode: Regex,
    reward: Regex,
    entropy: Regex,
    eval: Regex,
}

const NUMBER: &str = r"([\-\d\.eE]+)";

impl LogParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            episode: Regex::new(r"updates (\d+)/\d+ episodes, total num timesteps (\d+)/\d+")?,
            reward: Regex::new(&format!("average episode rewards is {}", NUMBER))?,
            entropy: Regex::new(&format!("policy entropy is {}", NUMBER))?,
            eval: Regex::new(&format!("eval average episode rewards of agent: {}", NUMBER))?,
        })
    }

    /// Parse a whole log.
    ///
    /// Blocks missing their reward or entropy line are skipped with a
    /// warning and parsing resumes four lines later. When both lines are
    /// present but a value does not parse, parsing resumes on the next line.
    pub fn parse(&self, text: &str) -> TrainingSeries {
        let lines: Vec<&str> = text.trim().lines().map(str::trim).collect();
        let mut series = TrainingSeries::default();

        let mut i = 0;
        while i < lines.len() {
            let Some(caps) = self.episode.captures(lines[i]) else {
                i += 1;
                continue;
            };
            let (Ok(ep), Ok(ts)) = (caps[1].parse::<u64>(), caps[2].parse::<u64>()) else {
                tracing::warn!(line = i, "Unreadable episode counters, skipping line");
                i += 1;
                continue;
            };

            let at = |offset: usize| lines.get(i + offset).copied().unwrap_or("");
            let reward = capture_f64(&self.reward, at(2));
            let entropy = capture_f64(&self.entropy, at(3));

            let (reward, entropy) = match (reward, entropy) {
                (Some(Ok(r)), Some(Ok(e))) => (r, e),
                (None, _) | (_, None) => {
                    tracing::warn!(line = i, "Reward or entropy not found, skipping block");
                    i += 4;
                    continue;
                }
                _ => {
                    tracing::warn!(line = i, "Malformed metric value, skipping line");
                    i += 1;
                    continue;
                }
            };

            series.episodes.push(ep);
            series.timesteps.push(ts);
            series.avg_rewards.push(reward);
            series.entropies.push(entropy);

            if let Some(Ok(eval)) = capture_f64(&self.eval, at(4)) {
                series.eval_episodes.push(ep);
                series.eval_rewards.push(eval);
                i += 5;
            } else {
                i += 4;
            }
        }

        tracing::debug!(
            blocks = series.len(),
            evals = series.eval_rewards.len(),
            "Parsed training log"
        );
        series
    }
}

/// `None` when the pattern does not match, `Some(Err)` when the captured
/// number does not parse
fn capture_f64(re: &Regex, line: &str) -> Option<std::result::Result<f64, std::num::ParseFloatError>> {
    re.captures(line).map(|caps| caps[1].parse::<f64>())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(ep: u64, ts: u64, reward: f64, entropy: f64) -> String {
        format!(
            " Scenario simple_spread Algo mappo updates {}/100 episodes, total num timesteps {}/40000, FPS 812.\n\
             \n\
             average episode rewards is {}\n\
             policy entropy is {}\n",
            ep, ts, reward, entropy
        )
    }

    #[test]
    fn test_parse_blocks() {
        let log = format!("header\n{}{}", block(0, 400, -50.5, 1.6), block(5, 2400, -42.25, 1.4));
        let series = LogParser::new().unwrap().parse(&log);

        assert_eq!(series.episodes, vec![0, 5]);
        assert_eq!(series.timesteps, vec![400, 2400]);
        assert_eq!(series.avg_rewards, vec![-50.5, -42.25]);
        assert_eq!(series.entropies, vec![1.6, 1.4]);
        assert!(series.eval_rewards.is_empty());
    }

    #[test]
    fn test_eval_line_consumed() {
        let log = format!(
            "{}eval average episode rewards of agent: -3.5e1\n{}",
            block(10, 4400, -40.0, 1.2),
            block(15, 6400, -38.0, 1.1)
        );
        let series = LogParser::new().unwrap().parse(&log);

        assert_eq!(series.episodes, vec![10, 15]);
        assert_eq!(series.eval_episodes, vec![10]);
        assert_eq!(series.eval_rewards, vec![-35.0]);
    }

    #[test]
    fn test_missing_entropy_skips_block() {
        let broken = "updates 1/100 episodes, total num timesteps 800/40000\n\
                      \n\
                      average episode rewards is -10\n\
                      value loss is 0.3\n";
        let log = format!("{}{}", broken, block(2, 1200, -9.0, 1.0));
        let series = LogParser::new().unwrap().parse(&log);

        assert_eq!(series.episodes, vec![2]);
        assert_eq!(series.avg_rewards, vec![-9.0]);
    }

    #[test]
    fn test_unparsable_reward_with_missing_entropy_skips_block() {
        let broken = "updates 1/100 episodes, total num timesteps 800/40000\n\
                      \n\
                      average episode rewards is -\n";
        let log = format!("{}{}", broken, block(2, 1200, -9.0, 1.0));
        let series = LogParser::new().unwrap().parse(&log);

        // The next marker sits at +3, inside the skipped block
        assert!(series.is_empty());
    }

    #[test]
    fn test_unparsable_value_resumes_next_line() {
        let broken = "updates 1/100 episodes, total num timesteps 800/40000\n\
                      \n\
                      average episode rewards is 1.2.3\n\
                      policy entropy is 1.0\n";
        let log = format!("{}{}", broken, block(2, 1200, -9.0, 1.0));
        let series = LogParser::new().unwrap().parse(&log);

        assert_eq!(series.episodes, vec![2]);
        assert_eq!(series.entropies, vec![1.0]);
    }

    #[test]
    fn test_truncated_log() {
        let log = "updates 3/100 episodes, total num timesteps 10/40000\n\naverage episode rewards is 1.0";
        let series = LogParser::new().unwrap().parse(log);
        assert!(series.is_empty());
    }
}
