use crate::ingest::IgnoredFile;
use crate::model::StudyDictionary;
use crate::tree::DisplayTree;
use std::fmt;

/// Text report of a reference tree and the files left out of it
pub struct TreeReport<'a> {
    tree: &'a DisplayTree,
    ignored: &'a [IgnoredFile],
}

impl<'a> TreeReport<'a> {
    pub fn new(tree: &'a DisplayTree, ignored: &'a [IgnoredFile]) -> Self {
        Self { tree, ignored }
    }
}

impl<'a> fmt::Display for TreeReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Reference Tree")?;
        writeln!(f, "==============")?;
        if self.tree.root.is_empty() {
            writeln!(f, "(no series)")?;
        } else {
            write!(f, "{}", self.tree)?;
        }

        if !self.ignored.is_empty() {
            writeln!(f)?;
            writeln!(f, "Ignored Files")?;
            writeln!(f, "-------------")?;
            for file in self.ignored {
                writeln!(f, "{}: {}", file.name, file.reason)?;
            }
        }
        Ok(())
    }
}

/// Study → Series table with warnings
pub struct StudyReport<'a> {
    studies: &'a StudyDictionary,
}

impl<'a> StudyReport<'a> {
    pub fn new(studies: &'a StudyDictionary) -> Self {
        Self { studies }
    }
}

impl<'a> fmt::Display for StudyReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for study in self.studies.studies() {
            let uid = study.study_instance_uid().unwrap_or("<unknown>");
            writeln!(f, "Study {}", uid)?;
            writeln!(f, "  Type:        {}", study.study_type())?;
            writeln!(f, "  Date:        {}", study.study_date)?;
            writeln!(f, "  Description: {}", study.study_description)?;
            writeln!(f, "  Patient sex: {}", study.patient_sex)?;
            writeln!(f, "  Birth date:  {}", study.patient_birth_date)?;
            writeln!(
                f,
                "  Ready:       {}",
                if study.is_ready() { "yes" } else { "no" }
            )?;
            for warning in &study.warnings {
                writeln!(f, "  {}", warning)?;
            }

            for series in study.series() {
                writeln!(
                    f,
                    "  - {} [{}] {} ({} instances)",
                    series.series_instance_uid().unwrap_or("<unknown>"),
                    series.modality_code,
                    series.series_description,
                    series.instance_count()
                )?;
                for (name, values) in series.inconsistent_parameters() {
                    writeln!(f, "      {}: {}", name, values)?;
                }
                for warning in &series.warnings {
                    writeln!(f, "      {}", warning)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ct_file, parsed};
    use crate::tree::TreeBuilder;
    use crate::types::Warning;

    #[test]
    fn test_tree_report_lists_ignored_files() {
        let ignored = vec![IgnoredFile {
            name: "broken.dcm".to_string(),
            reason: "Negative length".to_string(),
        }];
        let tree = DisplayTree::default();
        let output = TreeReport::new(&tree, &ignored).to_string();

        assert!(output.contains("(no series)"));
        assert!(output.contains("broken.dcm: Negative length"));
    }

    #[test]
    fn test_tree_report_renders_tree() {
        let mut dict = StudyDictionary::new();
        dict.register("ct", parsed(&ct_file("ST1", "CT1", "CT1.1"))).unwrap();
        let tree = DisplayTree::from(&TreeBuilder::new(&dict).build().unwrap());
        let output = TreeReport::new(&tree, &[]).to_string();

        assert!(output.contains("CT1 [CT] Planning CT"));
        assert!(!output.contains("Ignored Files"));
    }

    #[test]
    fn test_study_report() {
        let mut dict = StudyDictionary::new();
        dict.register("a", parsed(&ct_file("ST1", "CT1", "CT1.1"))).unwrap();
        dict.get_study_mut("ST1")
            .unwrap()
            .warnings
            .push(Warning::blocking("missing-image-series", "none"));
        let output = StudyReport::new(&dict).to_string();

        assert!(output.contains("Study ST1"));
        assert!(output.contains("  Type:        CT"));
        assert!(output.contains("  Ready:       no"));
        assert!(output.contains("  - CT1 [CT] Planning CT (1 instances)"));
        assert!(output.contains("[warning] missing-image-series: none"));
    }
}
