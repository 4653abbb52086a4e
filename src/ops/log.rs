use crate::error::Result;
use crate::hash::Hash;
use crate::repo::Repo;
use crate::store::read_commit;
use crate::types::Commit;

/// commit with its hash for log output
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub hash: Hash,
    pub commit: Commit,
}

/// commit history reachable from HEAD, newest first
///
/// empty while the current branch is unborn.
pub async fn log(repo: &Repo, max_count: Option<usize>) -> Result<Vec<LogEntry>> {
    let Some(head) = repo.head_commit() else {
        return Ok(Vec::new());
    };

    let mut entries = Vec::new();
    let mut to_visit = vec![head];
    let mut visited = std::collections::HashSet::new();

    while let Some(hash) = to_visit.pop() {
        if !visited.insert(hash) {
            continue;
        }

        let commit = read_commit(repo.store.as_ref(), &hash).await?;

        // visit parents oldest-last so linear history stays in order
        for parent in commit.parents.iter().rev() {
            to_visit.push(*parent);
        }

        entries.push(LogEntry { hash, commit });
    }

    // newest first; the sort is stable so ties keep visit order
    entries.sort_by(|a, b| b.commit.timestamp.cmp(&a.commit.timestamp));

    if let Some(max) = max_count {
        entries.truncate(max);
    }

    Ok(entries)
}

impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "commit {}", self.hash)?;
        writeln!(f, "Author: {}", self.commit.author)?;
        writeln!(f, "Date:   {}", format_timestamp(self.commit.timestamp))?;
        writeln!(f)?;
        for line in self.commit.message.lines() {
            writeln!(f, "    {}", line)?;
        }
        Ok(())
    }
}

/// render a millisecond timestamp as a UTC date and time
fn format_timestamp(millis: i64) -> String {
    let secs = millis.div_euclid(1000);
    let secs_of_day = secs.rem_euclid(86_400);
    let mut days = secs.div_euclid(86_400).max(0);

    // peel off whole years, then whole months, from days since 1970-01-01
    let mut year = 1970;
    while days >= year_days(year) {
        days -= year_days(year);
        year += 1;
    }
    let mut month = 1;
    while days >= month_days(year, month) {
        days -= month_days(year, month);
        month += 1;
    }

    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
        year,
        month,
        days + 1,
        secs_of_day / 3600,
        (secs_of_day / 60) % 60,
        secs_of_day % 60,
    )
}

fn is_leap(year: i64) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

fn year_days(year: i64) -> i64 {
    if is_leap(year) {
        366
    } else {
        365
    }
}

fn month_days(year: i64, month: i64) -> i64 {
    match month {
        2 if is_leap(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}
