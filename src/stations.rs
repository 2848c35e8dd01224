// Suburban and regional station catalog used for itinerary validation and lookup

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Station {
    pub code: &'static str,
    pub name: &'static str,
    pub city: &'static str,
    pub line: &'static str,
}

impl Station {
    const fn new(
        code: &'static str,
        name: &'static str,
        city: &'static str,
        line: &'static str,
    ) -> Self {
        Self {
            code,
            name,
            city,
            line,
        }
    }
}

// Interchange stations appear once per line they serve.
static STATIONS: &[Station] = &[
    Station::new("CCG", "Churchgate", "Mumbai", "Western"),
    Station::new("MRNE", "Marine Lines", "Mumbai", "Western"),
    Station::new("CHRR", "Charni Road", "Mumbai", "Western"),
    Station::new("GNRD", "Grant Road", "Mumbai", "Western"),
    Station::new("BCT", "Mumbai Central", "Mumbai", "Western"),
    Station::new("MMRD", "Mahalaxmi", "Mumbai", "Western"),
    Station::new("LRD", "Lower Parel", "Mumbai", "Western"),
    Station::new("PREL", "Prabhadevi", "Mumbai", "Western"),
    Station::new("DDR", "Dadar", "Mumbai", "Western"),
    Station::new("MTNL", "Matunga Road", "Mumbai", "Western"),
    Station::new("MMRDA", "Mahim Junction", "Mumbai", "Western"),
    Station::new("BA", "Bandra", "Mumbai", "Western"),
    Station::new("KHRD", "Khar Road", "Mumbai", "Western"),
    Station::new("STNC", "Santacruz", "Mumbai", "Western"),
    Station::new("VLPE", "Vile Parle", "Mumbai", "Western"),
    Station::new("ADH", "Andheri", "Mumbai", "Western"),
    Station::new("JOG", "Jogeshwari", "Mumbai", "Western"),
    Station::new("RAM", "Ram Mandir", "Mumbai", "Western"),
    Station::new("GRD", "Goregaon", "Mumbai", "Western"),
    Station::new("MRVD", "Malad", "Mumbai", "Western"),
    Station::new("KNVD", "Kandivali", "Mumbai", "Western"),
    Station::new("BVI", "Borivali", "Mumbai", "Western"),
    Station::new("DAHN", "Dahisar", "Mumbai", "Western"),
    Station::new("MIRA", "Mira Road", "Thane", "Western"),
    Station::new("BYNR", "Bhayandar", "Thane", "Western"),
    Station::new("NSP", "Naigaon", "Palghar", "Western"),
    Station::new("VR", "Vasai Road", "Palghar", "Western"),
    Station::new("NLI", "Nalla Sopara", "Palghar", "Western"),
    Station::new("VRD", "Virar", "Palghar", "Western"),
    Station::new("VTNL", "Vaitarna", "Palghar", "Western"),
    Station::new("SFRN", "Saphale", "Palghar", "Western"),
    Station::new("KELI", "Kelve Road", "Palghar", "Western"),
    Station::new("PGR", "Palghar", "Palghar", "Western"),
    Station::new("UMR", "Umroli", "Palghar", "Western"),
    Station::new("BOR", "Boisar", "Palghar", "Western"),
    Station::new("DHRM", "Dahanu Road", "Palghar", "Western"),
    Station::new("CSMT", "Chhatrapati Shivaji Maharaj Terminus", "Mumbai", "Central"),
    Station::new("MSD", "Masjid Bunder", "Mumbai", "Central"),
    Station::new("SNT", "Sandhurst Road", "Mumbai", "Central"),
    Station::new("BCL", "Byculla", "Mumbai", "Central"),
    Station::new("CHNI", "Chinchpokli", "Mumbai", "Central"),
    Station::new("CRD", "Currey Road", "Mumbai", "Central"),
    Station::new("DR", "Dadar", "Mumbai", "Central"),
    Station::new("MTN", "Matunga", "Mumbai", "Central"),
    Station::new("SIN", "Sion", "Mumbai", "Central"),
    Station::new("KLA", "Kurla", "Mumbai", "Central"),
    Station::new("VKR", "Vidyavihar", "Mumbai", "Central"),
    Station::new("GCN", "Ghatkopar", "Mumbai", "Central"),
    Station::new("VKD", "Vikhroli", "Mumbai", "Central"),
    Station::new("KNO", "Kanjurmarg", "Mumbai", "Central"),
    Station::new("BNS", "Bhandup", "Mumbai", "Central"),
    Station::new("NHV", "Nahur", "Mumbai", "Central"),
    Station::new("MNK", "Mulund", "Mumbai", "Central"),
    Station::new("TNA", "Thane", "Thane", "Central"),
    Station::new("KPR", "Kalwa", "Thane", "Central"),
    Station::new("MNBR", "Mumbra", "Thane", "Central"),
    Station::new("DI", "Diva Junction", "Thane", "Central"),
    Station::new("KOPR", "Kopar", "Thane", "Central"),
    Station::new("DRD", "Dombivli", "Thane", "Central"),
    Station::new("TKL", "Thakurli", "Thane", "Central"),
    Station::new("KYN", "Kalyan Junction", "Thane", "Central"),
    Station::new("VGI", "Vithalwadi", "Thane", "Central"),
    Station::new("UBR", "Ulhasnagar", "Thane", "Central"),
    Station::new("ABH", "Ambernath", "Thane", "Central"),
    Station::new("BDR", "Badlapur", "Thane", "Central"),
    Station::new("VAS", "Vangani", "Thane", "Central"),
    Station::new("SKRD", "Shelu", "Thane", "Central"),
    Station::new("NRL", "Neral", "Raigad", "Central"),
    Station::new("BHVN", "Bhivpuri Road", "Raigad", "Central"),
    Station::new("KJT", "Karjat", "Raigad", "Central"),
    Station::new("PLYN", "Palasdhari", "Raigad", "Central"),
    Station::new("KPSI", "Kelavli", "Raigad", "Central"),
    Station::new("DOI", "Dolavli", "Raigad", "Central"),
    Station::new("LNL", "Lowjee", "Raigad", "Central"),
    Station::new("KMAY", "Khopoli", "Raigad", "Central"),
    Station::new("CSMT", "CSMT", "Mumbai", "Harbour"),
    Station::new("MSBR", "Masjid Bunder", "Mumbai", "Harbour"),
    Station::new("SNRD", "Sandhurst Road", "Mumbai", "Harbour"),
    Station::new("DCRD", "Dockyard Road", "Mumbai", "Harbour"),
    Station::new("RLG", "Reay Road", "Mumbai", "Harbour"),
    Station::new("CTNG", "Cotton Green", "Mumbai", "Harbour"),
    Station::new("SGR", "Sewri", "Mumbai", "Harbour"),
    Station::new("WDLA", "Wadala Road", "Mumbai", "Harbour"),
    Station::new("GTR", "GTB Nagar", "Mumbai", "Harbour"),
    Station::new("CLBG", "Chunabhatti", "Mumbai", "Harbour"),
    Station::new("KURL", "Kurla", "Mumbai", "Harbour"),
    Station::new("TLPD", "Tilak Nagar", "Mumbai", "Harbour"),
    Station::new("CNN", "Chembur", "Mumbai", "Harbour"),
    Station::new("GCV", "Govandi", "Mumbai", "Harbour"),
    Station::new("MNKD", "Mankhurd", "Mumbai", "Harbour"),
    Station::new("VKP", "Vashi", "Navi Mumbai", "Harbour"),
    Station::new("SNPD", "Sanpada", "Navi Mumbai", "Harbour"),
    Station::new("JUI", "Juinagar", "Navi Mumbai", "Harbour"),
    Station::new("NRI", "Nerul", "Navi Mumbai", "Harbour"),
    Station::new("SWD", "Seawoods Darave", "Navi Mumbai", "Harbour"),
    Station::new("BEPR", "Belapur CBD", "Navi Mumbai", "Harbour"),
    Station::new("KHKP", "Kharghar", "Navi Mumbai", "Harbour"),
    Station::new("MNSR", "Mansarovar", "Navi Mumbai", "Harbour"),
    Station::new("KLMB", "Khandeshwar", "Navi Mumbai", "Harbour"),
    Station::new("PNVL", "Panvel", "Navi Mumbai", "Harbour"),
    Station::new("TNA", "Thane", "Thane", "Trans-Harbour"),
    Station::new("ARBS", "Airoli", "Navi Mumbai", "Trans-Harbour"),
    Station::new("RBVR", "Rabale", "Navi Mumbai", "Trans-Harbour"),
    Station::new("GHNS", "Ghansoli", "Navi Mumbai", "Trans-Harbour"),
    Station::new("KPR", "Kopar Khairane", "Navi Mumbai", "Trans-Harbour"),
    Station::new("TBE", "Turbhe", "Navi Mumbai", "Trans-Harbour"),
    Station::new("VKP", "Vashi", "Navi Mumbai", "Trans-Harbour"),
    Station::new("LTT", "Lokmanya Tilak Terminus", "Mumbai", "Terminus"),
    Station::new("BDTS", "Bandra Terminus", "Mumbai", "Terminus"),
    Station::new("PUNE", "Pune Junction", "Pune", "Pune"),
    Station::new("SVJR", "Shivajinagar", "Pune", "Pune"),
    Station::new("KK", "Khadki", "Pune", "Pune"),
    Station::new("DPR", "Dapodi", "Pune", "Pune"),
    Station::new("KSW", "Kasarwadi", "Pune", "Pune"),
    Station::new("PCMT", "Pimpri Chinchwad", "Pune", "Pune"),
    Station::new("CKNN", "Chinchwad", "Pune", "Pune"),
    Station::new("AKD", "Akurdi", "Pune", "Pune"),
    Station::new("DEU", "Dehu Road", "Pune", "Pune"),
    Station::new("BGM", "Begdewadi", "Pune", "Pune"),
    Station::new("TVS", "Talegaon", "Pune", "Pune"),
    Station::new("VDGN", "Vadgaon", "Pune", "Pune"),
    Station::new("KNH", "Kanhe", "Pune", "Pune"),
    Station::new("KMSHT", "Kamshet", "Pune", "Pune"),
    Station::new("MLV", "Malavli", "Pune", "Pune"),
    Station::new("LNL", "Lonavala", "Pune", "Pune"),
    Station::new("NGP", "Nagpur Junction", "Nagpur", "Other"),
    Station::new("SUR", "Solapur Junction", "Solapur", "Other"),
    Station::new("KOP", "Kolhapur", "Kolhapur", "Other"),
    Station::new("NSK", "Nashik Road", "Nashik", "Other"),
    Station::new("AWB", "Aurangabad", "Aurangabad", "Other"),
    Station::new("AK", "Akola Junction", "Akola", "Other"),
    Station::new("NED", "Nanded", "Nanded", "Other"),
    Station::new("J", "Jalgaon Junction", "Jalgaon", "Other"),
    Station::new("BSL", "Bhusaval Junction", "Bhusaval", "Other"),
    Station::new("MMR", "Manmad Junction", "Manmad", "Other"),
    Station::new("IGP", "Igatpuri", "Igatpuri", "Other"),
    Station::new("KSR", "Kasara", "Thane", "Other"),
    Station::new("ASG", "Asangaon", "Thane", "Other"),
    Station::new("AO", "Atgaon", "Thane", "Other"),
    Station::new("TLJ", "Titwala", "Thane", "Other"),
    Station::new("KDH", "Khadavli", "Thane", "Other"),
    Station::new("VSD", "Vasind", "Thane", "Other"),
    Station::new("ABY", "Ambivli", "Thane", "Other"),
    Station::new("SGO", "Shahad", "Thane", "Other"),
];

pub fn all() -> &'static [Station] {
    STATIONS
}

/// First catalog entry for `code`, compared case-insensitively
pub fn find(code: &str) -> Option<&'static Station> {
    let code = code.trim();
    STATIONS
        .iter()
        .find(|station| station.code.eq_ignore_ascii_case(code))
}

pub fn is_known(code: &str) -> bool {
    find(code).is_some()
}

/// Every line a station code is listed under
pub fn lines_for(code: &str) -> Vec<&'static str> {
    let code = code.trim();
    STATIONS
        .iter()
        .filter(|station| station.code.eq_ignore_ascii_case(code))
        .map(|station| station.line)
        .collect()
}

/// Stations whose code, name or city contains `query` (case-insensitive)
pub fn search(query: &str) -> Vec<&'static Station> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return STATIONS.iter().collect();
    }
    STATIONS
        .iter()
        .filter(|station| {
            station.code.to_lowercase().contains(&query)
                || station.name.to_lowercase().contains(&query)
                || station.city.to_lowercase().contains(&query)
        })
        .collect()
}

/// Display name for a code, falling back to the code itself
pub fn display_name(code: &str) -> String {
    match find(code) {
        Some(station) => format!("{} ({})", station.name, station.code),
        None => code.to_string(),
    }
}
