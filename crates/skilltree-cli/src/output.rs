use serde::Serialize;
use skilltree_core::skill::SkillView;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let line = |cells: Vec<String>| {
        let padded: Vec<String> = cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let w = widths.get(i).copied().unwrap_or(0);
                format!("{cell:w$}")
            })
            .collect();
        println!("{}", padded.join("  ").trim_end());
    };

    line(headers.iter().map(|h| h.to_string()).collect());
    line(widths.iter().map(|&w| "-".repeat(w)).collect());
    for row in rows {
        line(row);
    }
}

/// One row per skill: level, position, y, status, title, id.
pub fn print_skills(skills: &[SkillView]) {
    let rows = skills
        .iter()
        .map(|v| {
            let s = &v.skill;
            let mut title = s.title.clone();
            if v.is_final_node {
                title.push_str(" *");
            }
            if s.manual_lock {
                title.push_str(" (pinned)");
            }
            vec![
                s.level.to_string(),
                s.level_position.to_string(),
                s.y.to_string(),
                s.status.to_string(),
                title,
                s.id.to_string(),
            ]
        })
        .collect();
    print_table(&["LVL", "POS", "Y", "STATUS", "TITLE", "ID"], rows);
}
