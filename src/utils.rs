use crate::entities::Task;
use byte_unit::{Byte, UnitType};

const TABLE_TITLES: [&str; 7] = [
    "Id",
    "Download",
    "Destination",
    "Status",
    "Downloaded",
    "Total",
    "Progress",
];

/// Formats a byte count with decimal units, e.g. `1.23 GB`
#[must_use]
pub fn human_size(bytes: u64) -> String {
    let size = Byte::from(bytes);
    format!("{:#.2}", size.get_appropriate_unit(UnitType::Decimal))
}

impl Task {
    #[must_use]
    pub fn calculate_size(&self) -> String {
        human_size(self.size)
    }

    #[must_use]
    pub fn size_downloaded(&self) -> u64 {
        self.additional
            .as_ref()
            .and_then(|additional| additional.transfer.as_ref())
            .map(|transfer| transfer.size_downloaded)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn calculate_downloaded(&self) -> String {
        human_size(self.size_downloaded())
    }

    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn calculate_progress(&self) -> f64 {
        self.additional
            .as_ref()
            .and_then(|additional| additional.transfer.as_ref())
            .map(|transfer| {
                let size_downloaded = transfer.size_downloaded;
                (size_downloaded as f64 / self.size as f64 * 100.0).round()
            })
            .take_if(|x| x.is_finite())
            .unwrap_or_default()
    }

    /// Destination folder on the NAS, empty when the detail block is missing
    #[must_use]
    pub fn destination(&self) -> &str {
        self.additional
            .as_ref()
            .and_then(|additional| additional.detail.as_ref())
            .map_or("", |detail| detail.destination.as_str())
    }
}

/// Renders tasks as an aligned table, one line per task in the given order
#[must_use]
pub fn format_task_table(tasks: &[Task]) -> String {
    let rows: Vec<[String; 7]> = tasks
        .iter()
        .map(|task| {
            [
                task.id.clone(),
                task.title.clone(),
                task.destination().to_string(),
                task.status.clone(),
                task.calculate_downloaded(),
                task.calculate_size(),
                format!("{}%", task.calculate_progress()),
            ]
        })
        .collect();

    let mut widths = TABLE_TITLES.map(|title| title.chars().count());
    for row in &rows {
        for (width, field) in widths.iter_mut().zip(row) {
            *width = (*width).max(field.chars().count());
        }
    }

    let mut table = String::new();
    let titles = TABLE_TITLES.map(String::from);
    for row in std::iter::once(&titles).chain(&rows) {
        let line = format!(
            "{:<w0$} {:<w1$}  {:<w2$}  {:<w3$}  {:>w4$} / {:<w5$}  {:>w6$}",
            row[0],
            row[1],
            row[2],
            row[3],
            row[4],
            row[5],
            row[6],
            w0 = widths[0],
            w1 = widths[1],
            w2 = widths[2],
            w3 = widths[3],
            w4 = widths[4],
            w5 = widths[5],
            w6 = widths[6],
        );
        table.push_str(line.trim_end());
        table.push('\n');
    }
    table
}

/// Renders every known field of a task, one `key: value` per line
#[must_use]
pub fn format_task_details(task: &Task) -> String {
    let detail = task
        .additional
        .as_ref()
        .and_then(|additional| additional.detail.as_ref());

    let mut lines = vec![
        format!("Id:          {}", task.id),
        format!("Title:       {}", task.title),
        format!("Status:      {}", task.status),
        format!("Type:        {}", task.task_type),
    ];
    if let Some(detail) = detail {
        lines.push(format!("URI:         {}", detail.uri));
        lines.push(format!("Destination: {}", detail.destination));
        if let Some(created) = detail.create_time {
            lines.push(format!("Created:     {}", created.format("%Y-%m-%d %H:%M:%S")));
        }
    }
    lines.push(format!("Size:        {}", task.calculate_size()));
    lines.push(format!("Downloaded:  {}", task.calculate_downloaded()));
    lines.push(format!("Progress:    {}%", task.calculate_progress()));

    lines.iter().map(|line| format!("{line}\n")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{AdditionalTaskInfo, Detail, Transfer};
    use chrono::DateTime;

    impl Task {
        fn create_test_task() -> Task {
            Task {
                id: String::from("dbid_123"),
                username: String::from("admin"),
                task_type: String::from("http"),
                title: String::from("Ubuntu 16.04"),
                size: 1_234_567_890,
                status: String::from("downloading"),
                additional: Some(AdditionalTaskInfo {
                    detail: Some(Detail {
                        destination: String::from("video/Films"),
                        uri: String::from("https://example.com/ubuntu.iso"),
                        create_time: DateTime::from_timestamp(1_700_000_000, 0),
                        ..Default::default()
                    }),
                    transfer: Some(Transfer {
                        size_downloaded: 98765,
                        ..Default::default()
                    }),
                }),
            }
        }
    }

    #[test]
    fn test_human_size() {
        assert_eq!("1.23 GB", human_size(1_234_567_890));
        assert_eq!("98.77 KB", human_size(98765));
    }

    #[test]
    fn test_calculate_progress() {
        let mut task = Task::create_test_task();
        task.size = 200_000;
        assert!((task.calculate_progress() - 49.0).abs() < f64::EPSILON);

        task.size = 0;
        task.additional.as_mut().unwrap().transfer.as_mut().unwrap().size_downloaded = 0;
        assert!(task.calculate_progress().abs() < f64::EPSILON);

        task.additional = None;
        assert!(task.calculate_progress().abs() < f64::EPSILON);
        assert_eq!("", task.destination());
    }

    #[test]
    fn test_format_task_table() {
        let mut second = Task::create_test_task();
        second.id = String::from("dbid_2");
        second.title = String::from("A much longer title");
        second.status = String::from("paused");
        second.size = 98765;

        let table = format_task_table(&[Task::create_test_task(), second]);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(3, lines.len());
        assert_eq!(
            "Id       Download             Destination  Status       Downloaded / Total     Progress",
            lines[0]
        );
        assert_eq!(
            "dbid_123 Ubuntu 16.04         video/Films  downloading    98.77 KB / 1.23 GB         0%",
            lines[1]
        );
        assert_eq!(
            "dbid_2   A much longer title  video/Films  paused         98.77 KB / 98.77 KB      100%",
            lines[2]
        );
    }

    #[test]
    fn test_format_task_table_empty() {
        assert_eq!(
            "Id Download  Destination  Status  Downloaded / Total  Progress\n",
            format_task_table(&[])
        );
    }

    #[test]
    fn test_format_task_details() {
        let details = format_task_details(&Task::create_test_task());
        assert!(details.contains("Title:       Ubuntu 16.04\n"));
        assert!(details.contains("Destination: video/Films\n"));
        assert!(details.contains("Created:     2023-11-14 22:13:20\n"));
        assert!(details.contains("Size:        1.23 GB\n"));
    }

    #[test]
    fn test_format_task_details_without_detail() {
        let mut task = Task::create_test_task();
        task.additional.as_mut().unwrap().detail = None;
        assert_eq!(
            "Id:          dbid_123\n\
             Title:       Ubuntu 16.04\n\
             Status:      downloading\n\
             Type:        http\n\
             Size:        1.23 GB\n\
             Downloaded:  98.77 KB\n\
             Progress:    0%\n",
            format_task_details(&task)
        );
    }
}
