// Timezone derivation from North American area codes

use serde::{Deserialize, Serialize};

/// Calling timezone of a lead, derived from the phone's area code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Timezone {
    Eastern,
    Central,
    Mountain,
    Pacific,
    Alaska,
    Hawaii,
    Unknown,
}

impl Timezone {
    pub const ALL: [Timezone; 7] = [
        Timezone::Eastern,
        Timezone::Central,
        Timezone::Mountain,
        Timezone::Pacific,
        Timezone::Alaska,
        Timezone::Hawaii,
        Timezone::Unknown,
    ];

    /// Look up the timezone for a 3-digit area code.
    ///
    /// Area codes that straddle a zone boundary are assigned to the zone
    /// covering most of their population.
    pub fn from_area_code(area_code: &str) -> Self {
        let Ok(code) = area_code.parse::<u16>() else {
            return Timezone::Unknown;
        };

        match code {
            // CT, DE, DC, FL, GA, IN, KY (east), ME, MD, MA, MI
            203 | 475 | 860 | 959 | 302 | 202 | 239 | 305 | 321 | 352 | 386 | 407 | 561
            | 656 | 689 | 727 | 754 | 772 | 786 | 813 | 863 | 904 | 941 | 954 | 229 | 404
            | 470 | 478 | 678 | 706 | 762 | 770 | 912 | 943 | 260 | 317 | 463 | 574 | 765
            | 812 | 930 | 502 | 606 | 859 | 207 | 240 | 301 | 410 | 443 | 667 | 339 | 351
            | 413 | 508 | 617 | 774 | 781 | 857 | 978 | 231 | 248 | 269 | 313 | 517 | 586
            | 616 | 679 | 734 | 810 | 947 | 989
            // NH, NJ, NY, NC, OH, PA, RI, SC, TN (east), VT, VA, WV
            | 603 | 201 | 551 | 609 | 640 | 732 | 848 | 856 | 862 | 908 | 973 | 212 | 315
            | 332 | 347 | 516 | 518 | 585 | 607 | 631 | 646 | 680 | 716 | 718 | 838 | 845
            | 914 | 917 | 929 | 934 | 252 | 336 | 704 | 743 | 828 | 910 | 919 | 980 | 984
            | 216 | 220 | 234 | 283 | 326 | 330 | 380 | 419 | 440 | 513 | 567 | 614 | 740
            | 937 | 215 | 223 | 267 | 272 | 412 | 445 | 484 | 570 | 582 | 610 | 717 | 724
            | 814 | 835 | 878 | 401 | 803 | 839 | 843 | 854 | 864 | 423 | 865 | 802 | 276
            | 434 | 540 | 571 | 703 | 757 | 804 | 826 | 948 | 304 | 681
            // Ontario, Quebec
            | 226 | 249 | 289 | 343 | 365 | 416 | 437 | 519 | 548 | 613 | 647 | 705 | 905
            | 418 | 438 | 450 | 514 | 579 | 581 | 819 | 873 => Timezone::Eastern,

            // AL, AR, FL (panhandle), IL, IA, KS, KY (west), LA, MN, MS, MO, NE
            205 | 251 | 256 | 334 | 659 | 938 | 479 | 501 | 870 | 448 | 850 | 217 | 224
            | 309 | 312 | 331 | 447 | 464 | 618 | 630 | 708 | 730 | 773 | 779 | 815 | 847
            | 872 | 319 | 515 | 563 | 641 | 712 | 316 | 620 | 785 | 913 | 270 | 364 | 225
            | 318 | 337 | 504 | 985 | 218 | 320 | 507 | 612 | 651 | 763 | 952 | 228 | 601
            | 662 | 769 | 314 | 417 | 557 | 573 | 636 | 660 | 816 | 975 | 308 | 402 | 531
            // ND, OK, SD, TN, TX, WI
            | 701 | 405 | 539 | 572 | 580 | 918 | 605 | 615 | 629 | 731 | 901 | 931 | 210
            | 214 | 254 | 281 | 325 | 346 | 361 | 409 | 430 | 432 | 469 | 512 | 682 | 713
            | 726 | 737 | 806 | 817 | 830 | 832 | 903 | 936 | 940 | 945 | 956 | 972 | 979
            | 262 | 274 | 414 | 534 | 608 | 715 | 920
            // Manitoba, Saskatchewan
            | 204 | 431 | 306 | 639 => Timezone::Central,

            // AZ, CO, ID, MT, NM, UT, WY, TX (El Paso), Alberta
            480 | 520 | 602 | 623 | 928 | 303 | 719 | 720 | 970 | 983 | 208 | 986 | 406
            | 505 | 575 | 385 | 435 | 801 | 307 | 915 | 368 | 403 | 587 | 780 | 825 => {
                Timezone::Mountain
            }

            // CA, NV, OR, WA, British Columbia
            209 | 213 | 279 | 310 | 323 | 341 | 350 | 408 | 415 | 424 | 442 | 510 | 530
            | 559 | 562 | 619 | 626 | 628 | 650 | 657 | 661 | 669 | 707 | 714 | 747 | 760
            | 805 | 818 | 820 | 831 | 840 | 858 | 909 | 916 | 925 | 949 | 951 | 702 | 725
            | 775 | 458 | 503 | 541 | 971 | 206 | 253 | 360 | 425 | 509 | 564 | 236 | 250
            | 604 | 672 | 778 => Timezone::Pacific,

            907 => Timezone::Alaska,
            808 => Timezone::Hawaii,

            _ => Timezone::Unknown,
        }
    }

    /// Derive the timezone from a raw phone string.
    pub fn from_phone(raw: &str) -> Self {
        crate::domain::phone::area_code(raw)
            .map(|code| Self::from_area_code(&code))
            .unwrap_or(Timezone::Unknown)
    }
}

impl std::fmt::Display for Timezone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Timezone::Eastern => write!(f, "EASTERN"),
            Timezone::Central => write!(f, "CENTRAL"),
            Timezone::Mountain => write!(f, "MOUNTAIN"),
            Timezone::Pacific => write!(f, "PACIFIC"),
            Timezone::Alaska => write!(f, "ALASKA"),
            Timezone::Hawaii => write!(f, "HAWAII"),
            Timezone::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl std::str::FromStr for Timezone {
    type Err = crate::domain::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EASTERN" | "EST" | "EDT" | "ET" => Ok(Timezone::Eastern),
            "CENTRAL" | "CST" | "CDT" | "CT" => Ok(Timezone::Central),
            "MOUNTAIN" | "MST" | "MDT" | "MT" => Ok(Timezone::Mountain),
            "PACIFIC" | "PST" | "PDT" | "PT" => Ok(Timezone::Pacific),
            "ALASKA" | "AKST" | "AKDT" => Ok(Timezone::Alaska),
            "HAWAII" | "HST" => Ok(Timezone::Hawaii),
            "UNKNOWN" => Ok(Timezone::Unknown),
            other => Err(crate::domain::DomainError::ValidationError(format!(
                "Unknown timezone: {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_area_code() {
        assert_eq!(Timezone::from_area_code("212"), Timezone::Eastern);
        assert_eq!(Timezone::from_area_code("312"), Timezone::Central);
        assert_eq!(Timezone::from_area_code("303"), Timezone::Mountain);
        assert_eq!(Timezone::from_area_code("415"), Timezone::Pacific);
        assert_eq!(Timezone::from_area_code("907"), Timezone::Alaska);
        assert_eq!(Timezone::from_area_code("808"), Timezone::Hawaii);
        assert_eq!(Timezone::from_area_code("555"), Timezone::Unknown);
        assert_eq!(Timezone::from_area_code("abc"), Timezone::Unknown);
    }

    #[test]
    fn test_from_phone() {
        assert_eq!(Timezone::from_phone("(512) 555-0100"), Timezone::Central);
        assert_eq!(Timezone::from_phone("+1 206 555 0100"), Timezone::Pacific);
        assert_eq!(Timezone::from_phone("12"), Timezone::Unknown);
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("est".parse::<Timezone>().unwrap(), Timezone::Eastern);
        assert_eq!("Pacific".parse::<Timezone>().unwrap(), Timezone::Pacific);
        assert!("mars".parse::<Timezone>().is_err());
    }
}
