//! Region-grouped prefecture checklist.

use resas_chart_population_models::Prefecture;
use resas_chart_region_models::{REGIONS, Region, RegionIndex};
use serde::Serialize;

/// Group name used for prefectures that no region lists.
pub const OTHER_GROUP: &str = "その他";

/// Prefectures belonging to one region, in region member order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionGroup {
    /// Japanese region name.
    pub name: String,
    /// Romanized region name.
    pub english_name: String,
    /// Member prefectures present in the directory.
    pub prefectures: Vec<Prefecture>,
}

/// Groups `prefectures` by [`REGIONS`].
#[must_use]
pub fn group_by_region(prefectures: &[Prefecture]) -> Vec<RegionGroup> {
    group_with(REGIONS, RegionIndex::canonical(), prefectures)
}

/// Groups `prefectures` under `regions`, using `index` (built from the same
/// table) to find each prefecture's region and its place within it.
///
/// Regions with no loaded member are omitted. Prefectures that no region
/// lists are collected into a trailing [`OTHER_GROUP`] in directory order.
#[must_use]
pub fn group_with(
    regions: &[Region],
    index: &RegionIndex,
    prefectures: &[Prefecture],
) -> Vec<RegionGroup> {
    let mut members: Vec<Vec<Prefecture>> = vec![Vec::new(); regions.len()];
    let mut orphans: Vec<Prefecture> = Vec::new();

    for p in prefectures {
        match index
            .region_index(p.code)
            .and_then(|idx| members.get_mut(idx))
        {
            Some(bucket) => bucket.push(p.clone()),
            None => orphans.push(p.clone()),
        }
    }

    let mut groups: Vec<RegionGroup> = regions
        .iter()
        .zip(members)
        .filter(|(_, prefectures)| !prefectures.is_empty())
        .map(|(region, mut prefectures)| {
            prefectures.sort_by_key(|p| index.position(p.code));
            RegionGroup {
                name: region.name.to_string(),
                english_name: region.english_name.to_string(),
                prefectures,
            }
        })
        .collect();

    if !orphans.is_empty() {
        log::debug!("{} prefectures are not listed in any region", orphans.len());
        groups.push(RegionGroup {
            name: OTHER_GROUP.to_string(),
            english_name: "Other".to_string(),
            prefectures: orphans,
        });
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pref(code: u32, name: &str) -> Prefecture {
        Prefecture {
            code,
            name: name.to_string(),
        }
    }

    #[test]
    fn groups_follow_region_and_member_order() {
        let directory = vec![
            pref(27, "大阪府"),
            pref(13, "東京都"),
            pref(8, "茨城県"),
            pref(1, "北海道"),
        ];
        let groups = group_by_region(&directory);

        assert_eq!(
            groups.iter().map(|g| g.english_name.as_str()).collect::<Vec<_>>(),
            vec!["Hokkaido", "Kanto", "Kinki"]
        );
        assert_eq!(
            groups[1].prefectures.iter().map(|p| p.code).collect::<Vec<_>>(),
            vec![8, 13]
        );
    }

    #[test]
    fn unlisted_prefectures_go_last() {
        let directory = vec![pref(99, "架空県"), pref(1, "北海道")];
        let groups = group_by_region(&directory);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1].name, OTHER_GROUP);
        assert_eq!(groups[1].prefectures[0].code, 99);
    }

    #[test]
    fn custom_table_groups_by_first_listing_region() {
        const TABLE: &[Region] = &[
            Region {
                name: "東",
                english_name: "East",
                member_codes: &[5, 3],
            },
            Region {
                name: "西",
                english_name: "West",
                member_codes: &[3, 9],
            },
        ];
        let index = RegionIndex::new(TABLE);
        let directory = vec![pref(9, "c"), pref(3, "b"), pref(5, "a")];
        let groups = group_with(TABLE, &index, &directory);

        assert_eq!(groups.len(), 2);
        assert_eq!(
            groups[0].prefectures.iter().map(|p| p.code).collect::<Vec<_>>(),
            vec![5, 3]
        );
        assert_eq!(
            groups[1].prefectures.iter().map(|p| p.code).collect::<Vec<_>>(),
            vec![9]
        );
    }

    #[test]
    fn empty_directory_has_no_groups() {
        assert!(group_by_region(&[]).is_empty());
    }
}
