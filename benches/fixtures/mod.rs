// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Tocb-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Tocb and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![allow(dead_code)]

// Shared deterministic benchmark fixtures (no RNG).

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use tocb::model::{Diagram, FlowColumn, GroupId, SavedDiagram};
use tocb::ops::{apply_ops, GroupOp, HeaderPatch, Op};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

pub struct TempDir {
    path: PathBuf,
}

impl TempDir {
    pub fn new(prefix: &str) -> Self {
        let pid = std::process::id();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);

        let mut path = std::env::temp_dir();
        path.push(format!("tocb_bench_{prefix}_{pid}_{nanos}_{counter}"));
        std::fs::create_dir_all(&path).expect("create temp dir");

        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    Small,
    Medium,
    LargeLongText,
}

impl Case {
    pub const ALL: [Case; 3] = [Case::Small, Case::Medium, Case::LargeLongText];

    pub const fn id(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::LargeLongText => "large_long_text",
        }
    }

    /// `(groups, cell text length)`
    pub const fn params(self) -> (u32, usize) {
        match self {
            Self::Small => (3, 24),
            Self::Medium => (20, 80),
            Self::LargeLongText => (80, 400),
        }
    }
}

fn text_of_len(prefix: &str, len: usize) -> String {
    let mut out = String::with_capacity(len);
    out.push_str(prefix);
    let mut word = 0usize;
    while out.len() < len {
        out.push_str(if word % 3 == 0 { " outcome" } else { " \"quoted\", text" });
        word += 1;
    }
    out.truncate(len);
    out
}

pub fn diagram(case: Case) -> Diagram {
    let (groups, cell_len) = case.params();
    let mut diagram = Diagram::default();

    let mut ops = vec![Op::Header(HeaderPatch {
        title: Some(format!("Bench {}", case.id())),
        need_content: Some(Some(text_of_len("need", cell_len))),
        ..HeaderPatch::default()
    })];
    for id in 2..=groups {
        ops.push(Op::Group(GroupOp::Add {
            group_id: GroupId::new(id),
            name: format!("Group {id}"),
        }));
    }
    for index in 0..groups as usize {
        for column in FlowColumn::ALL {
            ops.push(Op::SetCell {
                column,
                index,
                content: text_of_len(&format!("{}-{index}", column.key()), cell_len),
            });
        }
    }
    apply_ops(&mut diagram, &ops).expect("fixture ops");
    diagram
}

pub fn saved(case: Case) -> SavedDiagram {
    SavedDiagram::new(format!("bench {}", case.id()), diagram(case))
}
